pub const TOPIC_SET_TEMP: &str = "/devices/climate_control/controls/setTemp";
pub const TOPIC_FAN_SPEED: &str = "/devices/climate_control/controls/cooler_speed";
pub const TOPIC_POWER: &str = "/devices/climate_control/controls/cooler1_status";
pub const TOPIC_MODE: &str = "/devices/climate_control/controls/cooler_mode";

pub const SUBSCRIPTIONS: &[&str] = &[TOPIC_SET_TEMP, TOPIC_FAN_SPEED, TOPIC_POWER, TOPIC_MODE];
