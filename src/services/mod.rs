//! Business logic services

pub mod checkin_service;
pub mod group_service;
pub mod grouping;
pub mod judge_service;
pub mod lottery;
pub mod participant_service;
pub mod score_service;

pub use checkin_service::CheckinService;
pub use group_service::GroupService;
pub use judge_service::JudgeService;
pub use participant_service::ParticipantService;
pub use score_service::ScoreService;
