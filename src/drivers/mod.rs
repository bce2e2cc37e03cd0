pub mod drv10970;
pub mod hmc5883;
pub mod icm42688;
pub mod imu;
pub mod ina209;
pub mod photodiode_mux;
pub mod tes_link;
pub mod zxmb5210;
