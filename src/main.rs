#[cfg(feature = "csr")]
fn main() {
    portal::start();
}

#[cfg(not(feature = "csr"))]
fn main() {
    eprintln!("portal is a browser app; build it with `trunk serve --features csr`");
}
