mod client;
mod helpers;
mod lifecycle;
mod reconnect;
