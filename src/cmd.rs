pub struct Cmd;
#[allow(dead_code)]
impl Cmd {
    pub const NOP: u8 = 0x00;
    pub const SW_RESET: u8 = 0x01;
    pub const SLEEP_IN: u8 = 0x10;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const PARTIAL_ON: u8 = 0x12;
    pub const NORMAL_ON: u8 = 0x13;
    pub const INVERSION_OFF: u8 = 0x20;
    pub const INVERSION_ON: u8 = 0x21;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDRESS_SET: u8 = 0x2A;
    pub const ROW_ADDRESS_SET: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const VSCROLL_DEFINE: u8 = 0x33;
    pub const TEARING_OFF: u8 = 0x34;
    pub const TEARING_ON: u8 = 0x35;
    pub const MEMORY_ACCESS_CTRL: u8 = 0x36;
    pub const VSCROLL_START: u8 = 0x37;
    pub const COLOR_MODE: u8 = 0x3A;
    pub const RAM_CTRL: u8 = 0xB0;
    pub const PORCH_CTRL: u8 = 0xB2;
    pub const GATE_CTRL: u8 = 0xB7;
    pub const VCOM_SET: u8 = 0xBB;
    pub const LCM_CTRL: u8 = 0xC0;
    pub const VDV_VRH_ENABLE: u8 = 0xC2;
    pub const VDV_SET: u8 = 0xC4;
    pub const FRAME_RATE_CTRL2: u8 = 0xC6;
    pub const POWER_CTRL1: u8 = 0xD0;
    pub const POSITIVE_GAMMA: u8 = 0xE0;
    pub const NEGATIVE_GAMMA: u8 = 0xE1;
}
