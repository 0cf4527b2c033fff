pub mod brightness;
pub mod frame_stats;
pub mod passive_tap;
pub mod test_frame_source;

pub use brightness::Brightness;
pub use frame_stats::FrameStats;
pub use passive_tap::PassiveTap;
pub use test_frame_source::TestFrameSource;
