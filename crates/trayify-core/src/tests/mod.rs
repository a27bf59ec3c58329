mod fakes;
mod menu;
