mod memory_provider_test;
mod sqlite_provider_test;
