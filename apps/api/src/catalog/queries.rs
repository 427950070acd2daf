/// Bulk lot search. Only the fields the service reads are selected.
pub const LOT_SEARCH_QUERY: &str = r#"query LotSearch(
  $pageNumber: Int!,
  $pageLength: Int!,
  $category: CategoryId = null,
  $searchText: String = null,
  $zip: String = null,
  $miles: Int = null,
  $shippingOffered: Boolean = false,
  $status: AuctionLotStatus = null,
  $sortOrder: EventItemSortOrder = null,
  $filter: AuctionLotFilter = null,
  $countAsView: Boolean = true
) {
  lotSearch(
    input: {
      category: $category
      searchText: $searchText
      zip: $zip
      miles: $miles
      shippingOffered: $shippingOffered
      status: $status
      sortOrder: $sortOrder
      filter: $filter
      countAsView: $countAsView
    }
    pageNumber: $pageNumber
    pageLength: $pageLength
    sortDirection: DESC
  ) {
    pagedResults {
      totalCount
      results {
        ...lotFields
      }
    }
  }
}
"#;

/// Single lot lookup, including the full picture list.
pub const LOT_DETAILS_QUERY: &str = r#"query GetLotDetails($lotId: Int!, $countAsView: Boolean = true) {
  lot(input: { id: $lotId, countAsView: $countAsView }) {
    lot {
      ...lotFields
      pictures {
        description
        fullSizeLocation
      }
    }
  }
}
"#;

/// Shared selection set appended to both operations.
pub const LOT_FIELDS_FRAGMENT: &str = r#"
fragment lotFields on Lot {
  id
  itemId
  lead
  description
  pictureCount
  featuredPicture {
    description
    fullSizeLocation
  }
  auction {
    bidOpenDateTime
    bidCloseDateTime
    buyerPremium
    bidIncrements {
      minBidIncrement
      upToAmount
    }
    auctionOptions {
      shippingType
    }
  }
  lotState {
    bidCount
    buyNow
    highBid
    isClosed
    minBid
    status
    timeLeft
  }
}
"#;

/// Appends the shared fragment to an operation document.
pub fn document(operation: &str) -> String {
    format!("{operation}{LOT_FIELDS_FRAGMENT}")
}
