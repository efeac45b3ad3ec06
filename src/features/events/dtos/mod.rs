pub mod event_dto;

pub use event_dto::{
    CreateEventDto, EventQueryParams, EventResponseDto, EventTimeframe, RegistrantDto,
    UpdateEventDto,
};
