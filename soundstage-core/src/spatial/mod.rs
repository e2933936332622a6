// Spatial module - distance attenuation and rotation panning
//
// `gain` converts listener-to-speaker distances into normalized attenuation;
// `mixer` redistributes canonical virtual channels across the placed
// speakers under listener rotation.

pub mod gain;
mod mixer;

pub use mixer::RotationMixer;
