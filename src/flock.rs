pub mod formation;
