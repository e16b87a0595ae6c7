mod details;
mod header;
mod notifications;
mod panels;
