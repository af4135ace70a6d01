pub mod dict;
pub mod normalize;
pub mod prefix;
pub mod settings;
