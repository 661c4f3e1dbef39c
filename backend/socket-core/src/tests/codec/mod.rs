mod decoder;
mod encoder;
mod request_id;
