mod aggregator_tests;
mod runner_tests;
