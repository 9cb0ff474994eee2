pub mod prediction_controller;
