/// One tic worth of player intent, sampled from the keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputCmd {
    pub forward: f32, // –1 … +1
    pub strafe: f32,  // –1 … +1  (left / right)
    pub turn: f32,    // –1 … +1  (right / left)
    pub look: f32,    // –1 … +1  (down / up)
    pub run: bool,    // Shift
}

impl InputCmd {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && self.turn == 0.0 && self.look == 0.0
    }
}
