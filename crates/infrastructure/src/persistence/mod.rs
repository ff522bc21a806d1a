//! File-backed repositories

mod session_repository;

pub use session_repository::FileSessionRepository;
