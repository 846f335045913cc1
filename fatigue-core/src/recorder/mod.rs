pub mod sample_recorder;
