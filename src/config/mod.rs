// Re-export all items from the submodules
mod backup_config;
mod table_filter;

pub use backup_config::BackupConfig;

pub use table_filter::{
    TableFilter,
    parse_table_list,
};
