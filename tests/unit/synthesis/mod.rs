mod engine;
mod seed;
