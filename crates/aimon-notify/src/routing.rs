use aimon_common::types::AlertLevel;

pub struct ChannelRoute {
    pub min_level: AlertLevel,
    pub channel_index: usize,
}

impl ChannelRoute {
    pub fn should_send(&self, level: AlertLevel) -> bool {
        level >= self.min_level
    }
}
