mod builder;
mod close_event;
