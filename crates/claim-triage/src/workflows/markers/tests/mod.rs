mod common;
mod dynamics;
