pub mod excel;

pub use excel::write_export;
