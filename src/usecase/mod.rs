//! UseCase layer.
//!
//! Business operations invoked by the UI layer. Each use case orchestrates
//! the domain registry and hands back what the caller needs to answer the
//! client; it never touches sockets directly.

pub mod create_room;
pub mod drain;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod observe;
pub mod sweep_rooms;
pub mod update_code;
pub mod update_cursor;

pub use create_room::{CreateRoomUseCase, CreatedRoomOutput, JOIN_PATH_PREFIX};
pub use error::JoinError;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use observe::ObserveUseCase;
pub use sweep_rooms::SweepRoomsUseCase;
pub use update_code::UpdateCodeUseCase;
pub use update_cursor::UpdateCursorUseCase;
