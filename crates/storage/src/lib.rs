pub mod db;

pub use db::{
    create_db, export_all, insert_batch, insert_invoice, search, DbPool, InvoiceRow,
    StorageError,
};
