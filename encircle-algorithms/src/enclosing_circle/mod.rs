pub mod circle_ga;
