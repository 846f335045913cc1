pub mod sampling_session;
