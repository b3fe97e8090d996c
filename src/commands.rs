pub mod create_key;
