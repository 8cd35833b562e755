//! Pixel passes over premultiplied RGBA8 buffers.

use crate::{
    cover::layers::{DropShadow, GradientStop, LinearGradient, RadialGradient},
    foundation::{
        core::{Point, Rect},
        error::{PortadaError, PortadaResult},
        math::mul_div255_u8,
    },
};

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> PortadaResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PortadaError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(PortadaError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

/// Separable Gaussian blur with edge clamping.
pub(crate) fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }
    let mut tmp = vec![0u8; src.len()];
    horizontal_blur_q16(src, &mut tmp, width, height, kernel_q16);
    vertical_blur_q16(&tmp, dst, width, height, kernel_q16);
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

/// Tinted, offset and blurred copy of the alpha coverage of `src`.
///
/// `shadow` is in logical units; `scale` converts to device pixels. Sigma is half the blur radius.
pub(crate) fn drop_shadow(
    src: &[u8],
    width: u32,
    height: u32,
    shadow: &DropShadow,
    scale: f64,
) -> PortadaResult<Vec<u8>> {
    let tint = shadow.color.to_premul();
    let dx = (shadow.offset.x * scale).round() as i64;
    let dy = (shadow.offset.y * scale).round() as i64;
    let (w, h) = (i64::from(width), i64::from(height));

    let mut silhouette = vec![0u8; src.len()];
    for y in 0..h {
        let sy = y - dy;
        if sy < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if sx < 0 || sx >= w {
                continue;
            }
            let a = u16::from(src[((sy * w + sx) as usize) * 4 + 3]);
            if a == 0 {
                continue;
            }
            let o = ((y * w + x) as usize) * 4;
            silhouette[o] = mul_div255_u8(u16::from(tint.r), a);
            silhouette[o + 1] = mul_div255_u8(u16::from(tint.g), a);
            silhouette[o + 2] = mul_div255_u8(u16::from(tint.b), a);
            silhouette[o + 3] = mul_div255_u8(u16::from(tint.a), a);
        }
    }

    let sigma = (shadow.blur * scale / 2.0) as f32;
    if sigma <= 0.0 {
        return Ok(silhouette);
    }
    let radius = (sigma * 3.0).ceil() as u32;
    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut out = vec![0u8; silhouette.len()];
    blur_rgba8_premul_q16(&silhouette, &mut out, width, height, &kernel);
    Ok(out)
}

/// Source-over composite of `src` onto `dst` with an extra opacity factor.
pub(crate) fn premul_over_in_place_opacity(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) -> PortadaResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PortadaError::render(
            "premul_over_in_place_opacity expects equal-length rgba8 buffers",
        ));
    }
    let op = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
    if op == 0 {
        return Ok(());
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);
        d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            d[c] = sc.saturating_add(mul_div255_u8(u16::from(d[c]), inv));
        }
    }
    Ok(())
}

/// Apply a 4×5 colour matrix in straight-alpha space, keeping the buffer premultiplied.
pub(crate) fn color_matrix_rgba8_premul_in_place(buf: &mut [u8], m: [f32; 20]) {
    for px in buf.chunks_exact_mut(4) {
        let pa = f32::from(px[3]) / 255.0;
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = f32::from(px[0]) / 255.0 * inv_a;
        let g = f32::from(px[1]) / 255.0 * inv_a;
        let b = f32::from(px[2]) / 255.0 * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        px[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// CSS `contrast(k)`: `c' = (c - ½)·k + ½` per colour channel, alpha untouched.
pub(crate) fn contrast_matrix(k: f32) -> [f32; 20] {
    let o = 0.5 - 0.5 * k;
    [
        k, 0.0, 0.0, 0.0, o, //
        0.0, k, 0.0, 0.0, o, //
        0.0, 0.0, k, 0.0, o, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

/// Clear everything outside a rounded rectangle covering the whole buffer (anti-aliased).
pub(crate) fn round_corners_in_place(buf: &mut [u8], width: u32, height: u32, radius: f64) {
    let r = radius.min(f64::from(width) / 2.0).min(f64::from(height) / 2.0);
    if r <= 0.0 {
        return;
    }
    let (w, h) = (f64::from(width), f64::from(height));
    let band = r.ceil() as u32;
    for y in 0..height {
        let in_band_y = y < band || y >= height.saturating_sub(band);
        if !in_band_y {
            continue;
        }
        for x in 0..width {
            if x >= band && x < width.saturating_sub(band) {
                continue;
            }
            let px = f64::from(x) + 0.5;
            let py = f64::from(y) + 0.5;
            let cx = px.clamp(r, w - r);
            let cy = py.clamp(r, h - r);
            let dist = (px - cx).hypot(py - cy);
            let coverage = (r - dist + 0.5).clamp(0.0, 1.0);
            if coverage >= 1.0 {
                continue;
            }
            let cov = (coverage * 255.0).round() as u16;
            let i = ((y as usize) * (width as usize) + (x as usize)) * 4;
            for c in 0..4 {
                buf[i + c] = mul_div255_u8(u16::from(buf[i + c]), cov);
            }
        }
    }
}

/// Fill `buf` with a linear gradient; geometry is logical, `scale` maps it to device pixels.
pub(crate) fn paint_linear_gradient(
    buf: &mut [u8],
    width: u32,
    height: u32,
    scale: f64,
    g: &LinearGradient,
) {
    let d = g.end - g.start;
    let len2 = d.hypot2();
    paint_region(buf, width, height, scale, g.rect, |p| {
        let t = if len2 > 0.0 {
            (p - g.start).dot(d) / len2
        } else {
            0.0
        };
        sample_stops(&g.stops, t)
    });
}

/// Fill `buf` with stacked radial gradients, the first one on top.
pub(crate) fn paint_radial_gradients(
    buf: &mut [u8],
    width: u32,
    height: u32,
    scale: f64,
    rect: Rect,
    gradients: &[RadialGradient],
) {
    paint_region(buf, width, height, scale, rect, |p| {
        let mut out = [0.0f32; 4];
        for g in gradients.iter().rev() {
            let t = if g.radius > 0.0 {
                p.distance(g.center) / g.radius
            } else {
                1.0
            };
            let s = sample_stops(&g.stops, t);
            let inv = 1.0 - s[3];
            for c in 0..4 {
                out[c] = s[c] + out[c] * inv;
            }
        }
        out
    });
}

fn paint_region(
    buf: &mut [u8],
    width: u32,
    height: u32,
    scale: f64,
    rect: Rect,
    color_at: impl Fn(Point) -> [f32; 4],
) {
    let x0 = (rect.x0 * scale).floor().clamp(0.0, f64::from(width)) as u32;
    let x1 = (rect.x1 * scale).ceil().clamp(0.0, f64::from(width)) as u32;
    let y0 = (rect.y0 * scale).floor().clamp(0.0, f64::from(height)) as u32;
    let y1 = (rect.y1 * scale).ceil().clamp(0.0, f64::from(height)) as u32;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point::new(
                (f64::from(x) + 0.5) / scale,
                (f64::from(y) + 0.5) / scale,
            );
            let c = color_at(p);
            let i = ((y as usize) * (width as usize) + (x as usize)) * 4;
            for k in 0..4 {
                buf[i + k] = (c[k] * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Premultiplied colour at `t`, interpolating premultiplied stops and padding at both ends.
pub(crate) fn sample_stops(stops: &[GradientStop], t: f64) -> [f32; 4] {
    let premul = |s: &GradientStop| -> [f32; 4] {
        let a = s.color.a.clamp(0.0, 1.0) as f32;
        [
            f32::from(s.color.r) / 255.0 * a,
            f32::from(s.color.g) / 255.0 * a,
            f32::from(s.color.b) / 255.0 * a,
            a,
        ]
    };
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return [0.0; 4];
    };
    if t <= first.offset {
        return premul(first);
    }
    if t >= last.offset {
        return premul(last);
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t >= a.offset && t <= b.offset {
            let span = b.offset - a.offset;
            let f = if span > 0.0 {
                ((t - a.offset) / span) as f32
            } else {
                1.0
            };
            let (ca, cb) = (premul(a), premul(b));
            return [
                ca[0] + (cb[0] - ca[0]) * f,
                ca[1] + (cb[1] - ca[1]) * f,
                ca[2] + (cb[2] - ca[2]) * f,
                ca[3] + (cb[3] - ca[3]) * f,
            ];
        }
    }
    premul(last)
}

#[cfg(test)]
#[path = "../../tests/unit/render/effects.rs"]
mod tests;
