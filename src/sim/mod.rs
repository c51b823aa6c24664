mod input;
mod tic;

pub use input::InputCmd;
pub use tic::{DT, LOOK_RATE, MOVE_SPEED, RUN_FACTOR, SIM_FPS, TURN_RATE, TicRunner};
