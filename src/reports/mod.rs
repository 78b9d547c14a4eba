// Reports module - serialized report outputs

pub mod csv_export;

pub use csv_export::generate_csv_report;
