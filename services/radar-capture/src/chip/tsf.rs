//! Extending truncated hardware timestamps against the 64-bit TSF
//!
//! Receive descriptors only carry the low bits of the free-running TSF. The
//! full value is rebuilt by borrowing the high bits from a reference TSF
//! taken close to the event, then correcting by one window when the low bits
//! are on the other side of a wrap.

const TSF15_MASK: u64 = 0x7fff;
const TSF15_WINDOW: u64 = 0x8000;

const TSF32_MASK: u64 = 0xffff_ffff;
const TSF32_WINDOW: u64 = 0x1_0000_0000;
const TSF32_SLACK: u32 = 0x1000_0000;

/// Extend a 15-bit receive stamp.
///
/// The stamp is never later than the reference, so a stamp ahead of the
/// reference's low bits by more than half the window belongs to the
/// previous window.
pub fn extend_tsf15(rstamp: u16, tsf: u64) -> u64 {
    let rstamp = u64::from(rstamp) & TSF15_MASK;
    let tsf_low = tsf & TSF15_MASK;

    let base = if rstamp > tsf_low && rstamp - tsf_low > 0x3fff {
        tsf.wrapping_sub(TSF15_WINDOW)
    } else {
        tsf
    };

    (base & !TSF15_MASK) | rstamp
}

/// Extend a 32-bit receive stamp.
///
/// Stamps within `TSF32_SLACK` of a wrap may sit on either side of the
/// reference, so the correction goes both ways.
pub fn extend_tsf32(rstamp: u32, tsf: u64) -> u64 {
    let tsf_low = (tsf & TSF32_MASK) as u32;
    let extended = (tsf & !TSF32_MASK) | u64::from(rstamp);

    if rstamp > tsf_low && rstamp - tsf_low > TSF32_SLACK {
        extended.wrapping_sub(TSF32_WINDOW)
    } else if rstamp < tsf_low && tsf_low - rstamp > TSF32_SLACK {
        extended.wrapping_add(TSF32_WINDOW)
    } else {
        extended
    }
}
