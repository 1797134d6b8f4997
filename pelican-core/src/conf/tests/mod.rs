mod supervisor_tests;
mod worker_tests;
