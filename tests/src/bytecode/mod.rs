mod decoder;
mod detection;
mod properties;
