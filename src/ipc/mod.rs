//! IPC listener that accepts commands over a Unix socket.
//!
//! Hotkey daemons and scripts connect to the socket and send
//! newline-delimited command tokens, e.g.
//! `echo next-layout | socat - UNIX-CONNECT:$XDG_RUNTIME_DIR/hyprtile.sock`.

pub mod listener;

pub use listener::UnixSocketListener;
