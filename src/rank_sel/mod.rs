/*
 * SPDX-FileCopyrightText: 2024 Inria
 * SPDX-FileCopyrightText: 2024 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Dynamic rank/select over a bit vector.

The structure in this module supports rank and select queries and in-place
updates of whole 64-bit words by pairing the bit vector with a [compact
Fenwick tree](crate::fenwick) that indexes the number of ones of each
_line_ (a fixed group of words). The tree variant and the line width are
compile-time parameters, so there is no dynamic dispatch on the query path.

*/

mod line;
pub use line::*;
