use miniz_oxide::inflate::decompress_to_vec_zlib;
use nom::{
    bytes::complete::{tag, take},
    combinator::all_consuming,
    multi::many1,
    number::complete::be_u32,
    sequence::{preceded, tuple},
    IResult,
};
use png_packer::{EncoderOptions, PngPacker, SIGNATURE};

fn init_logging() {
    let _ = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .is_test(true)
        .try_init();
}

#[derive(Debug)]
struct ParsedChunk<'a> {
    chunk_type: &'a [u8],
    data: &'a [u8],
    crc: u32,
}

fn parse_chunk(input: &[u8]) -> IResult<&[u8], ParsedChunk<'_>> {
    let (input, length) = be_u32(input)?;
    let (input, (chunk_type, data, crc)) = tuple((take(4usize), take(length), be_u32))(input)?;
    Ok((
        input,
        ParsedChunk {
            chunk_type,
            data,
            crc,
        },
    ))
}

fn parse_png(input: &[u8]) -> Vec<ParsedChunk<'_>> {
    let (_, chunks) = all_consuming(preceded(tag(&SIGNATURE[..]), many1(parse_chunk)))(input)
        .expect("output should be a well formed chunk stream");
    chunks
}

/// What a caller does with the packer: signature, header, optional gamma,
/// one data chunk per deflate segment, terminator.
fn assemble(
    packer: &PngPacker,
    pixels: &[u8],
    width: u32,
    height: u32,
    gamma: Option<f64>,
) -> anyhow::Result<Vec<u8>> {
    let mut out = SIGNATURE.to_vec();
    out.extend(packer.pack_ihdr(width, height));
    if let Some(gamma) = gamma {
        out.extend(packer.pack_gama(gamma));
    }
    let filtered = packer.filter_data(pixels, width, height)?;
    let mut deflate = packer.create_deflate()?;
    let mut segments = deflate.write(&filtered)?;
    segments.extend(deflate.finish()?);
    for segment in &segments {
        out.extend(packer.pack_idat(segment));
    }
    out.extend(packer.pack_iend());
    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let (pa, pb, pc) = (
        (p - a as i16).abs(),
        (p - b as i16).abs(),
        (p - c as i16).abs(),
    );
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn unfilter(filtered: &[u8], stride: usize, height: usize, bpp: usize) -> Vec<u8> {
    let mut out = vec![0u8; stride * height];
    for (y, line) in filtered.chunks_exact(stride + 1).enumerate().take(height) {
        let (filter_type, data) = (line[0], &line[1..]);
        for x in 0..stride {
            let a = if x >= bpp { out[y * stride + x - bpp] } else { 0 };
            let b = if y > 0 { out[(y - 1) * stride + x] } else { 0 };
            let c = if y > 0 && x >= bpp {
                out[(y - 1) * stride + x - bpp]
            } else {
                0
            };
            let predicted = match filter_type {
                0 => 0,
                1 => a,
                2 => b,
                3 => ((a as u16 + b as u16) / 2) as u8,
                4 => paeth(a, b, c),
                other => panic!("unknown filter type {other}"),
            };
            out[y * stride + x] = data[x].wrapping_add(predicted);
        }
    }
    out
}

fn gradient_rgba(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255]);
        }
    }
    pixels
}

#[test]
fn assembled_file_has_valid_chunks_in_order() {
    init_logging();
    let packer = PngPacker::new(EncoderOptions::default()).unwrap();
    let (width, height) = (5, 4);
    let pixels = gradient_rgba(width, height);
    let png = assemble(&packer, &pixels, width, height, Some(0.45455)).unwrap();

    let chunks = parse_png(&png);
    let types: Vec<&[u8]> = chunks.iter().map(|c| c.chunk_type).collect();
    assert_eq!(types.first(), Some(&&b"IHDR"[..]));
    assert_eq!(types.get(1), Some(&&b"gAMA"[..]));
    assert_eq!(types.last(), Some(&&b"IEND"[..]));
    assert!(types[2..types.len() - 1].iter().all(|t| *t == b"IDAT"));

    for chunk in &chunks {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(chunk.chunk_type);
        hasher.update(chunk.data);
        assert_eq!(hasher.finalize(), chunk.crc, "{:?}", chunk.chunk_type);
    }

    let ihdr = &chunks[0];
    assert_eq!(ihdr.data, &[0, 0, 0, 5, 0, 0, 0, 4, 8, 6, 0, 0, 0]);
    assert_eq!(chunks[1].data, &45455u32.to_be_bytes());
    assert!(chunks.last().unwrap().data.is_empty());
}

#[test]
fn image_data_inflates_and_unfilters_to_the_pixels() {
    init_logging();
    let packer = PngPacker::new(EncoderOptions::default()).unwrap();
    let (width, height) = (7, 6);
    let pixels = gradient_rgba(width, height);
    let png = assemble(&packer, &pixels, width, height, None).unwrap();

    let compressed: Vec<u8> = parse_png(&png)
        .iter()
        .filter(|c| c.chunk_type == b"IDAT")
        .flat_map(|c| c.data.iter().copied())
        .collect();
    let filtered = decompress_to_vec_zlib(&compressed).unwrap();
    assert_eq!(filtered, packer.filter_data(&pixels, width, height).unwrap());
    assert_eq!(unfilter(&filtered, width as usize * 4, height as usize, 4), pixels);
}

#[test]
fn small_chunk_size_splits_image_data() {
    init_logging();
    let options = EncoderOptions {
        deflate_chunk_size: Some(64),
        deflate_level: Some(0),
        ..Default::default()
    };
    let packer = PngPacker::new(options).unwrap();
    let (width, height) = (16, 16);
    let pixels = gradient_rgba(width, height);
    let png = assemble(&packer, &pixels, width, height, None).unwrap();

    let chunks = parse_png(&png);
    let idats: Vec<_> = chunks.iter().filter(|c| c.chunk_type == b"IDAT").collect();
    assert!(idats.len() > 1);
    assert!(idats.iter().all(|c| c.data.len() <= 64));
    let compressed: Vec<u8> = idats.iter().flat_map(|c| c.data.iter().copied()).collect();
    let filtered = decompress_to_vec_zlib(&compressed).unwrap();
    assert_eq!(unfilter(&filtered, 64, 16, 4), pixels);
}

#[test]
fn sixteen_bit_grayscale_from_json_options() {
    init_logging();
    let options = EncoderOptions::from_json(
        r#"{ "colorType": 0, "inputColorType": 0, "bitDepth": 16, "filterTypes": [1] }"#,
    )
    .unwrap();
    let packer = PngPacker::new(options).unwrap();
    let samples = [0x0100u16, 0x0200, 0xff00, 0x1234];
    let pixels: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
    let png = assemble(&packer, &pixels, 2, 2, None).unwrap();

    let chunks = parse_png(&png);
    assert_eq!(&chunks[0].data[8..10], &[16, 0]);
    let compressed: Vec<u8> = chunks
        .iter()
        .filter(|c| c.chunk_type == b"IDAT")
        .flat_map(|c| c.data.iter().copied())
        .collect();
    let filtered = decompress_to_vec_zlib(&compressed).unwrap();
    assert_eq!(filtered[0], 1);
    assert_eq!(filtered[5], 1);
    let expected: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes()).collect();
    assert_eq!(unfilter(&filtered, 4, 2, 2), expected);
}

#[test]
fn color_type_mismatch_is_rejected_up_front() {
    let options = EncoderOptions::from_json(r#"{ "inputColorType": 3 }"#).unwrap();
    let err = PngPacker::new(options).unwrap_err();
    assert_eq!(
        err.to_string(),
        "option input color type:3 is not supported at present"
    );
}
