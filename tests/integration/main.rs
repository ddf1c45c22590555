//! Integration tests: OvenService → sequencer → actuators, driven end-to-end
//! through mock port adapters on a simulated clock.

mod mock_hw;

mod panel_tests;
mod reflow_run_tests;
