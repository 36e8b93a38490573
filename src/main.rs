use mantis_core::uci::UciSession;

fn main() {
    UciSession::new().run();
}
