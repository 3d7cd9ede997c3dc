//! Parsers for sexagesimal and decimal coordinates.

use crate::{coordinates::SkyCoord, errors::ParseCoordError};

const SEPARATORS: &[char] = &['h', 'd', 'm', 's', ':', '°', '\'', '"'];
const DEGREES_PER_HOUR: f64 = 15.0;

/// Parses a free-text sky coordinate into ICRS right ascension and declination degrees.
///
/// Accepted layouts:
/// - decimal degrees: `"10.6847 41.2687"` or `"10.6847, 41.2687"`
/// - sexagesimal with unit letters: `"00h42m44.51s +41d16m08.45s"`
/// - colon separated (right ascension in hours): `"00:42:44.51 +41:16:08.45"`
/// - six bare fields: `"00 42 44.51 +41 16 08.45"`
pub fn parse_sky_coord(input: &str) -> Result<SkyCoord, ParseCoordError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseCoordError::Empty);
    }
    let (ra, dec) = split_components(trimmed)?;
    SkyCoord::new(parse_right_ascension(&ra)?, parse_declination(&dec)?)
}

/// Parses a right ascension token into degrees.
///
/// Tokens containing `h` or `:` are read as hours; other sexagesimal tokens and bare numbers
/// are read as degrees.
pub fn parse_right_ascension(token: &str) -> Result<f64, ParseCoordError> {
    let token = token.trim();
    let degrees = if token.contains(['h', ':']) {
        let (negative, fields) = sexagesimal_fields(token)?;
        if negative {
            return Err(ParseCoordError::InvalidComponent(token.to_string()));
        }
        combine_fields(&fields)? * DEGREES_PER_HOUR
    } else if token.contains(SEPARATORS) {
        let (negative, fields) = sexagesimal_fields(token)?;
        if negative {
            return Err(ParseCoordError::InvalidComponent(token.to_string()));
        }
        combine_fields(&fields)?
    } else {
        parse_decimal(token)?
    };
    if !(0.0..360.0).contains(&degrees) {
        return Err(ParseCoordError::RightAscensionOutOfRange(degrees));
    }
    Ok(degrees)
}

/// Parses a declination token (sexagesimal or decimal degrees) into degrees.
pub fn parse_declination(token: &str) -> Result<f64, ParseCoordError> {
    let token = token.trim();
    let degrees = if token.contains(SEPARATORS) {
        let (negative, fields) = sexagesimal_fields(token)?;
        let magnitude = combine_fields(&fields)?;
        if negative {
            -magnitude
        } else {
            magnitude
        }
    } else {
        parse_decimal(token)?
    };
    if !(-90.0..=90.0).contains(&degrees) {
        return Err(ParseCoordError::DeclinationOutOfRange(degrees));
    }
    Ok(degrees)
}

fn split_components(input: &str) -> Result<(String, String), ParseCoordError> {
    if let Some((ra, dec)) = input.split_once(',') {
        return Ok((ra.trim().to_string(), dec.trim().to_string()));
    }
    let tokens: Vec<&str> = input.split_whitespace().collect();
    match tokens.as_slice() {
        [ra, dec] => Ok(((*ra).to_string(), (*dec).to_string())),
        [h, m, s, d, dm, ds] => Ok((format!("{h}h{m}m{s}s"), format!("{d}d{dm}m{ds}s"))),
        _ => Err(ParseCoordError::WrongComponentCount(input.to_string())),
    }
}

fn parse_decimal(token: &str) -> Result<f64, ParseCoordError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseCoordError::InvalidComponent(token.to_string()))
}

fn sexagesimal_fields(token: &str) -> Result<(bool, Vec<f64>), ParseCoordError> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let fields = body
        .split(SEPARATORS)
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| ParseCoordError::InvalidComponent(token.to_string()))
        })
        .collect::<Result<Vec<f64>, ParseCoordError>>()?;
    if fields.is_empty() || fields.len() > 3 {
        return Err(ParseCoordError::InvalidComponent(token.to_string()));
    }
    Ok((negative, fields))
}

fn combine_fields(fields: &[f64]) -> Result<f64, ParseCoordError> {
    let mut value = 0.0;
    let mut scale = 1.0;
    for (index, field) in fields.iter().enumerate() {
        if index > 0 && *field >= 60.0 {
            return Err(ParseCoordError::SexagesimalOverflow(*field));
        }
        value += field / scale;
        scale *= 60.0;
    }
    Ok(value)
}
