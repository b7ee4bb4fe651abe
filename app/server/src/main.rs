//! FILENAME: app/server/src/main.rs
// PURPOSE: Service entry point with unified logging.
// FORMAT: seq|level|category|message

fn main() {
    exporter_lib::run();
}
