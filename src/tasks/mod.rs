pub mod command_task;
pub mod control_task;
pub mod fg_task;
pub mod heartbeat_task;
pub mod sampler_task;
pub mod test_task;
