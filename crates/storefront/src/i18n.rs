//! User-facing message catalog for the supported locales.

use bazaar_core::Locale;

/// Messages the storefront itself produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    LoginRequired,
    LoginSuccess,
    LoggedOut,
    RegisterSuccess,
    AddedToCart,
    CartUpdated,
    RemovedFromCart,
    CartCleared,
    CartEmpty,
    QuantityMustBePositive,
    CountMustBePositive,
    ProductIdRequired,
    OrderIdRequired,
    CategoryIdRequired,
    OrderPlaced,
    RedirectingToPayment,
    PageNotFound,
    HomeTitle,
    ProductsTitle,
    CategoriesTitle,
    BrandsTitle,
    CartTitle,
    OrdersTitle,
    ProfileTitle,
    LoginTitle,
    RegisterTitle,
}

impl Message {
    /// The message text in the given locale.
    #[must_use]
    pub const fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en(),
            Locale::Ar => self.ar(),
        }
    }

    const fn en(self) -> &'static str {
        match self {
            Self::LoginRequired => "Please log in to continue",
            Self::LoginSuccess => "Logged in successfully",
            Self::LoggedOut => "Logged out",
            Self::RegisterSuccess => "Account created. Please log in.",
            Self::AddedToCart => "Product added to cart",
            Self::CartUpdated => "Cart updated",
            Self::RemovedFromCart => "Product removed from cart",
            Self::CartCleared => "Cart cleared",
            Self::CartEmpty => "Your cart is empty",
            Self::QuantityMustBePositive => "Quantity must be greater than zero",
            Self::CountMustBePositive => "Count must be greater than zero",
            Self::ProductIdRequired => "Product ID is required",
            Self::OrderIdRequired => "Order ID is required",
            Self::CategoryIdRequired => "Category ID is required",
            Self::OrderPlaced => "Order placed successfully",
            Self::RedirectingToPayment => "Redirecting to payment",
            Self::PageNotFound => "Page not found",
            Self::HomeTitle => "Home",
            Self::ProductsTitle => "Products",
            Self::CategoriesTitle => "Categories",
            Self::BrandsTitle => "Brands",
            Self::CartTitle => "Shopping Cart",
            Self::OrdersTitle => "My Orders",
            Self::ProfileTitle => "My Profile",
            Self::LoginTitle => "Login",
            Self::RegisterTitle => "Create Account",
        }
    }

    const fn ar(self) -> &'static str {
        match self {
            Self::LoginRequired => "يرجى تسجيل الدخول للمتابعة",
            Self::LoginSuccess => "تم تسجيل الدخول بنجاح",
            Self::LoggedOut => "تم تسجيل الخروج",
            Self::RegisterSuccess => "تم إنشاء الحساب. يرجى تسجيل الدخول.",
            Self::AddedToCart => "تمت إضافة المنتج إلى السلة",
            Self::CartUpdated => "تم تحديث السلة",
            Self::RemovedFromCart => "تمت إزالة المنتج من السلة",
            Self::CartCleared => "تم إفراغ السلة",
            Self::CartEmpty => "سلة التسوق فارغة",
            Self::QuantityMustBePositive => "يجب أن تكون الكمية أكبر من صفر",
            Self::CountMustBePositive => "يجب أن يكون العدد أكبر من صفر",
            Self::ProductIdRequired => "معرف المنتج مطلوب",
            Self::OrderIdRequired => "معرف الطلب مطلوب",
            Self::CategoryIdRequired => "معرف الفئة مطلوب",
            Self::OrderPlaced => "تم تقديم الطلب بنجاح",
            Self::RedirectingToPayment => "جارٍ التحويل إلى صفحة الدفع",
            Self::PageNotFound => "الصفحة غير موجودة",
            Self::HomeTitle => "الرئيسية",
            Self::ProductsTitle => "المنتجات",
            Self::CategoriesTitle => "الفئات",
            Self::BrandsTitle => "العلامات التجارية",
            Self::CartTitle => "سلة التسوق",
            Self::OrdersTitle => "طلباتي",
            Self::ProfileTitle => "ملفي الشخصي",
            Self::LoginTitle => "تسجيل الدخول",
            Self::RegisterTitle => "إنشاء حساب",
        }
    }
}

/// Shorthand for [`Message::text`].
#[must_use]
pub const fn t(locale: Locale, message: Message) -> &'static str {
    message.text(locale)
}
