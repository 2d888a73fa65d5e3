//! # votes-service
//!
//! Application layer: vote, romance and counter services, DTOs, and the
//! message consumers.

pub mod dto;
pub mod messaging;
pub mod services;

pub use dto::{
    AddVoteRequest, ChangeVoteRequest, CountersResponse,
    DeleteRomancesAcceptedResponse, HealthChecks, HealthResponse, HourlyCountersEntry,
    HourlyCountersQuery, HourlyCountersResponse, ReadinessResponse, RomanceResponse,
    VoteResponse,
};
pub use messaging::{listen, DeleteRomancesHandler, ListenStats};
pub use services::{
    load_romance, CounterService, RomanceService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, VoteService,
};
