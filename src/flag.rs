pub struct Flag;
#[allow(dead_code)]
impl Flag {
    /// MADCTL: page (row) address order bottom to top
    pub const MADCTL_MY: u8 = 0x80;
    /// MADCTL: column address order right to left
    pub const MADCTL_MX: u8 = 0x40;
    /// MADCTL: row/column exchange
    pub const MADCTL_MV: u8 = 0x20;
    pub const MADCTL_ML: u8 = 0x10;
    pub const MADCTL_BGR: u8 = 0x08;
    pub const MADCTL_RGB: u8 = 0x00;
    pub const COLOR_MODE_16BIT: u8 = 0x55;
    pub const COLOR_MODE_18BIT: u8 = 0x66;
    // 60Hz in normal mode
    pub const FRAME_RATE_60HZ: u8 = 0x0F;
    // V-blanking only
    pub const TEARING_MODE_VBLANK: u8 = 0x00;
}
