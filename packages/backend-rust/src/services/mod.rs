pub mod burnout;
