/// Integration tests running the journal workflow against real database files
mod basic_integration;
