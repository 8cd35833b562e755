use super::*;

#[test]
fn fnv_is_deterministic_and_order_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"ab");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"ab");
    let mut c = Fnv1a64::new_default();
    c.write_bytes(b"ba");
    assert_eq!(a.finish(), b.finish());
    assert_ne!(a.finish(), c.finish());
}

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
}

#[test]
fn premultiply_then_unpremultiply_opaque_is_identity() {
    let mut px = vec![10, 20, 30, 255, 200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..], &[0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
}

#[test]
fn unpremultiply_half_alpha() {
    let mut px = vec![64, 32, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128, 64, 0, 128]);
}
