mod bootstrapping_test;
mod downgrade_test;
mod failure_test;
mod migrate_test;
mod versioning_test;
